mod auth_test;
mod health_test;
mod issues_test;
mod media_test;
mod review_board_test;
mod schools_test;
