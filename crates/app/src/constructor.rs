//! Partial application of plugin constructors.
//!
//! The registrar knows the leading constructor arguments (the capability
//! object, the platform binding) at registration time; the host supplies the
//! trailing ones ([`HostArgs`]) each time it instantiates.

use std::sync::Arc;

use rusty_spotify_domain::error::BridgeError;

use crate::ports::host::{Constructor, HostArgs};

type Target<B, T> = dyn Fn(B, HostArgs) -> Result<T, BridgeError> + Send + Sync;

/// A constructor with its leading argument `B` already applied.
pub struct BoundConstructor<B, T> {
    bound: B,
    target: Arc<Target<B, T>>,
}

impl<B, T> BoundConstructor<B, T>
where
    B: Clone + Send + Sync + 'static,
    T: 'static,
{
    /// Fix `bound` as the first argument of `target`.
    pub fn bind<F>(target: F, bound: B) -> Self
    where
        F: Fn(B, HostArgs) -> Result<T, BridgeError> + Send + Sync + 'static,
    {
        Self {
            bound,
            target: Arc::new(target),
        }
    }

    /// Invoke the target with the bound argument followed by `args`.
    ///
    /// # Errors
    ///
    /// Propagates the target's error.
    pub fn call(&self, args: HostArgs) -> Result<T, BridgeError> {
        (self.target)(self.bound.clone(), args)
    }

    /// Erase the bound argument, leaving the shape the host stores.
    pub fn into_constructor(self) -> Constructor<T> {
        Box::new(move |args| self.call(args))
    }
}

impl<B: Clone, T> Clone for BoundConstructor<B, T> {
    fn clone(&self) -> Self {
        Self {
            bound: self.bound.clone(),
            target: Arc::clone(&self.target),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn args(config: serde_json::Value) -> HostArgs {
        HostArgs::new(tracing::Span::none(), config)
    }

    #[test]
    fn should_prepend_bound_argument() {
        let ctor = BoundConstructor::bind(
            |prefix: String, args: HostArgs| Ok(format!("{prefix}:{}", args.config["name"])),
            "light".to_string(),
        );

        let built = ctor.call(args(serde_json::json!({ "name": "Kitchen" }))).unwrap();
        assert_eq!(built, "light:\"Kitchen\"");
    }

    #[test]
    fn should_pass_same_bound_value_on_every_call() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorder = Arc::clone(&seen);
        let ctor = BoundConstructor::bind(
            move |prefix: Arc<str>, args: HostArgs| {
                recorder.lock().unwrap().push((prefix, args.config));
                Ok(())
            },
            Arc::<str>::from("shared"),
        );

        ctor.call(args(serde_json::json!(1))).unwrap();
        ctor.call(args(serde_json::json!(2))).unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(Arc::ptr_eq(&seen[0].0, &seen[1].0));
        assert_eq!(seen[0].1, serde_json::json!(1));
        assert_eq!(seen[1].1, serde_json::json!(2));
    }

    #[test]
    fn should_not_invoke_target_when_binding() {
        let calls = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&calls);
        let _ctor = BoundConstructor::bind(
            move |(): (), _args: HostArgs| {
                *counter.lock().unwrap() += 1;
                Ok(())
            },
            (),
        );
        assert_eq!(*calls.lock().unwrap(), 0);
    }

    #[test]
    fn should_behave_the_same_after_erasure() {
        let ctor = BoundConstructor::bind(
            |prefix: u8, args: HostArgs| Ok(u64::from(prefix) + args.config.as_u64().unwrap_or(0)),
            40_u8,
        )
        .into_constructor();

        assert_eq!(ctor(args(serde_json::json!(2))).unwrap(), 42);
    }

    #[test]
    fn should_propagate_target_error() {
        let ctor = BoundConstructor::bind(
            |(): (), _args: HostArgs| -> Result<(), BridgeError> {
                Err(rusty_spotify_domain::error::ValidationError::EmptyName.into())
            },
            (),
        );
        assert!(matches!(
            ctor.call(args(serde_json::Value::Null)),
            Err(BridgeError::Validation(_))
        ));
    }
}
