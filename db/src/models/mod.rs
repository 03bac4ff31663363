pub mod course;
pub mod course_teacher;
pub mod event;
pub mod file;
pub mod issue;
pub mod issue_follower;
pub mod school;
pub mod school_course;
pub mod task;
pub mod user;

pub use course::Entity as Course;
pub use event::Entity as Event;
pub use file::Entity as File;
pub use issue::Entity as Issue;
pub use school::Entity as School;
pub use task::Entity as Task;
pub use user::Entity as User;
