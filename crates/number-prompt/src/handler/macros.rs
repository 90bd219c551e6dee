/// Macro to implement a host trait for smart pointer types (Box, Arc, etc.)
///
/// Generates delegating implementations for every listed method, so a host
/// shared behind `Arc<H>` can be handed to a prompt directly.
///
/// # Usage
/// ```ignore
/// impl_host_for_smart_ptr! {
///     impl UiSurfaceRegistry for Box<H> {
///         fn attach(&self, key: SurfaceKey, prompt: Prompt);
///         fn close_all(&self, owner: PromptId);
///     }
/// }
/// ```
#[macro_export]
macro_rules! impl_host_for_smart_ptr {
    (
        impl $trait:ident for $ptr:ty {
            $(
                $(#[$meta:meta])*
                fn $method:ident(&self $(, $param:ident: $param_ty:ty)*) $(-> $ret:ty)?;
            )*
        }
    ) => {
        impl<H: $trait> $trait for $ptr {
            $(
                $(#[$meta])*
                fn $method(&self $(, $param: $param_ty)*) $(-> $ret)? {
                    (**self).$method($($param),*)
                }
            )*
        }
    };
}

/// Convenience macro to implement a host trait for both Box and Arc
#[macro_export]
macro_rules! impl_host_for_box_and_arc {
    (
        impl $trait:ident {
            $(
                fn $method:ident(&self $(, $param:ident: $param_ty:ty)*) $(-> $ret:ty)?;
            )*
        }
    ) => {
        $crate::impl_host_for_smart_ptr! {
            impl $trait for Box<H> {
                $(
                    fn $method(&self $(, $param: $param_ty)*) $(-> $ret)?;
                )*
            }
        }

        $crate::impl_host_for_smart_ptr! {
            impl $trait for std::sync::Arc<H> {
                $(
                    fn $method(&self $(, $param: $param_ty)*) $(-> $ret)?;
                )*
            }
        }
    };
}
