pub mod evaluate;
pub mod lifecycle;
pub mod verify;
