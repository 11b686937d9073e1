mod helpers;

mod booking_test;
mod comment_test;
mod registration_test;
mod service_test;
