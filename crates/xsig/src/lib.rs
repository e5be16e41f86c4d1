#![forbid(unsafe_code)]

pub use xsig_c14n as c14n;
pub use xsig_callout as callout;
pub use xsig_core as core;
pub use xsig_crypto as crypto;
pub use xsig_dsig as dsig;
pub use xsig_keys as keys;
pub use xsig_transforms as transforms;
pub use xsig_xml as xml;
