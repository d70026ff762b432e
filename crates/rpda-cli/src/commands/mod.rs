//! Command handlers grouped by concern.

mod access;
mod list;
mod status;

pub(crate) use access::handle_access;
pub(crate) use list::handle_list;
pub(crate) use status::handle_status;
