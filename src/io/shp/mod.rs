mod prj;
mod read;

pub(crate) use prj::epsg_from_prj;
pub(crate) use read::*;
