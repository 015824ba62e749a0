pub mod command;
pub mod mmgetstate;
pub mod mmlsfileset;
pub mod mmlspool;
pub mod mmrepquota;
pub mod table;
