pub(crate) mod common;

mod test_rooms;
