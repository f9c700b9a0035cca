pub(crate) mod authority;

pub(crate) use authority::TokenAuthority;
