mod user;

pub use user::{
    User,
    create_user,
    get_user_by_id,
    get_user_by_email,
    user_email_exists,
};
