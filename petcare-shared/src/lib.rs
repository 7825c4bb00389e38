pub mod de;
pub mod device;
pub mod entities;
pub mod notification;
pub mod pet;
pub mod report;
