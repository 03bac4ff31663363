pub mod m202510010001_create_users;
pub mod m202510010002_create_courses;
pub mod m202510010003_create_schools;
pub mod m202510010004_create_course_teachers;
pub mod m202510010005_create_tasks;
pub mod m202510010006_create_issues;
pub mod m202510010007_create_issue_followers;
pub mod m202510010008_create_events;
pub mod m202510010009_create_files;
