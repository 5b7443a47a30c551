//! Define our own macro to simplify the code
//!

/// Call the HTTP client with the proper arguments
///
/// - unauth GET with query parameters
///
#[macro_export]
macro_rules! http_get_query {
    ($self:ident, $url:expr, $query:expr) => {
        $self
            .client
            .get($url)
            .header(
                "user-agent",
                format!("{}/{}", crate_name!(), crate_version!()),
            )
            .query($query)
            .send()
    };
}

/// Call the HTTP client with the proper arguments
///
/// - form-encoded POST, credentials are part of the form
///
#[macro_export]
macro_rules! http_post_form {
    ($self:ident, $url:expr, $form:expr) => {
        $self
            .client
            .post($url)
            .header(
                "user-agent",
                format!("{}/{}", crate_name!(), crate_version!()),
            )
            .form($form)
            .send()
    };
}
