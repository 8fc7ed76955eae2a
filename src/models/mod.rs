pub mod board;
pub mod column;
pub mod task;
pub mod user;

pub use board::{Board, BoardInput};
pub use column::{Column, ColumnInput};
pub use task::{
    Comment, CommentInput, CommentView, Task, TaskInput, TaskPriority, TaskStatus, TaskType,
    TaskUpdate,
};
pub use user::{AuthorProfile, User, UserCredentials};
