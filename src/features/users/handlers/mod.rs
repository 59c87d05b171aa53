pub mod user_handler;

pub use user_handler::{
    __path_create_user, __path_delete_user, __path_get_user_by_email, __path_list_users,
    __path_search_users, __path_update_user, create_user, delete_user, get_user_by_email,
    list_users, search_users, update_user,
};
