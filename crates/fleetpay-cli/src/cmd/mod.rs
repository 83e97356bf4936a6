pub mod company;
pub mod element;
pub mod pay;
pub mod period;
pub mod settlement;
