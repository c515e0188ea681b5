//! Integration tests against mock control planes

mod test_cloud;
mod test_session;
