pub mod assignment;
pub mod course;
pub mod exam;
pub mod homework;
pub mod semester;
pub mod user;

pub use assignment::{Assignment, AssignmentKind, AssignmentStatus, merge_views};
pub use course::{Course, CourseRef, NewCourseRequest, UpdateCourseRequest};
pub use exam::{Exam, ExamView, NewExamRequest, UpdateExamRequest};
pub use homework::{Homework, HomeworkView, NewHomeworkRequest, UpdateHomeworkRequest};
pub use semester::{SemesterNameRequest, SemesterOverview, UserSemester};
pub use user::{AuthResponse, LoginRequest, RegisterRequest, User, UserProfile};
