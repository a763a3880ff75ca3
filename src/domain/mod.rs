pub mod bill;
pub mod debt;
pub mod due;
pub mod entity;
pub mod goal;
pub mod notification;
