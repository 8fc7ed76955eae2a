pub mod auth;
pub mod boards;
pub mod health;
pub mod tasks;

use actix_web::web;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .service(auth::login)
            .service(auth::register),
    )
    .service(
        web::scope("/boards")
            .service(boards::create_board)
            .service(boards::list_boards)
            .service(boards::create_column)
            .service(boards::list_columns)
            .service(boards::create_task)
            .service(boards::list_tasks),
    )
    .service(
        web::scope("/tasks")
            .service(tasks::get_task)
            .service(tasks::update_task)
            .service(tasks::delete_task)
            .service(tasks::add_comment)
            .service(tasks::delete_comment),
    );
}
