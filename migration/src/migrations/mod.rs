pub mod m202601120001_create_users;
pub mod m202601120002_create_courses;
pub mod m202601150001_create_attendance_sessions;
pub mod m202601150002_create_attendance_records;
pub mod m202602090001_create_activity_log;
