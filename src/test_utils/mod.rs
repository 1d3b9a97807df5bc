#![allow(missing_docs)]

pub(crate) mod db;
pub(crate) mod http;

pub(crate) use db::{create_test_user, create_test_user_with_email};
pub(crate) use http::{
    TEST_PASSWORD, create_app_with_state_and_user, create_app_with_user, new_test_app_state,
    new_test_server, register_user_with_email,
};
