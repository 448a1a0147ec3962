//! Host-independent vocabulary shared by the loader controller and the
//! documents it drives.

pub mod domain;
pub mod protocol;
pub mod surface;
