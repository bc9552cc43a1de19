pub mod activity_log;
pub mod attendance_record;
pub mod attendance_session;
pub mod course;
pub mod user;

pub use activity_log::Entity as ActivityLog;
pub use attendance_record::Entity as AttendanceRecord;
pub use attendance_session::Entity as AttendanceSession;
pub use course::Entity as Course;
pub use user::Entity as User;
