mod certificate;
mod databag;
mod identity;
mod trust;

pub use certificate::*;
pub use databag::*;
pub use identity::*;
pub use trust::*;
