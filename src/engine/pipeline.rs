//! Middleware-wrapped reducer.

use std::sync::Arc;

use tracing::warn;

use crate::mixer::MixerDriver;
use crate::mvi::{Command, Intent, Reducer};

use super::message::Message;
use super::middleware::{HistoryMiddleware, Middleware, Next, TieBreakMiddleware};
use super::model::Model;
use super::reducer::{HandlerResult, SceneReducer, Update};

/// Number of built-in middlewares at the head of the chain.
const BUILTINS: usize = 2;

/// The full reducer: built-in middlewares, user middlewares, core reducer.
pub struct Pipeline {
    chain: Vec<Arc<dyn Middleware>>,
    core: SceneReducer,
}

impl Pipeline {
    pub fn new(driver: Arc<dyn MixerDriver>) -> Self {
        Self {
            chain: vec![
                Arc::new(HistoryMiddleware) as Arc<dyn Middleware>,
                Arc::new(TieBreakMiddleware),
            ],
            core: SceneReducer::new(driver),
        }
    }

    /// Append a user middleware after the built-ins and any earlier ones.
    pub fn with_middleware(mut self, middleware: Arc<dyn Middleware>) -> Self {
        self.chain.push(middleware);
        self
    }

    /// Names of the middlewares in chain order.
    pub fn middleware_names(&self) -> Vec<&'static str> {
        self.chain.iter().map(|m| m.name()).collect()
    }

    pub fn driver_name(&self) -> &'static str {
        self.core.driver_name()
    }

    /// Reduce without converting failures into an Error message.
    pub fn try_reduce(&self, model: &Model, message: Message) -> HandlerResult {
        Next::new(&self.chain, &self.chain[BUILTINS..], &self.core).run(model, message)
    }
}

impl Reducer for Pipeline {
    type State = Model;
    type Intent = Message;

    /// Handler failures leave the Model untouched and schedule an `Error`.
    fn reduce(&self, state: &Model, intent: Message) -> Update {
        let kind = intent.kind();
        match self.try_reduce(state, intent) {
            Ok(update) => update,
            Err(error) => {
                warn!(kind, error = %error, "Message rejected");
                Update::with_command(state.clone(), Command::ready(Message::Error { error }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::mixer::NoopDriver;

    struct Uppercase;

    impl Middleware for Uppercase {
        fn name(&self) -> &'static str {
            "uppercase"
        }

        fn handle(&self, model: &Model, message: Message, next: Next<'_>) -> HandlerResult {
            match message {
                Message::Custom { name, payload } if name == "shout" => {
                    let text = payload.as_str().unwrap_or_default().to_uppercase();
                    next.run(
                        model,
                        Message::PutCustomState {
                            state: Some(serde_json::Value::String(text)),
                        },
                    )
                }
                other => next.run(model, other),
            }
        }
    }

    #[test]
    fn user_middleware_runs_after_builtins() {
        let pipeline = Pipeline::new(Arc::new(NoopDriver)).with_middleware(Arc::new(Uppercase));
        assert_eq!(
            pipeline.middleware_names(),
            vec!["history", "tie_break", "uppercase"]
        );

        let update = pipeline.reduce(
            &Model::default(),
            Message::Custom {
                name: "shout".into(),
                payload: serde_json::json!("hi"),
            },
        );
        assert_eq!(update.state.custom_state, Some(serde_json::json!("HI")));
    }

    #[test]
    fn user_middleware_sees_nested_steps() {
        let pipeline = Pipeline::new(Arc::new(NoopDriver)).with_middleware(Arc::new(Uppercase));
        let step = Message::Custom {
            name: "shout".into(),
            payload: serde_json::json!("next"),
        };
        let update = pipeline.reduce(&Model::default(), Message::next(step));
        assert_eq!(update.state.custom_state, Some(serde_json::json!("NEXT")));
        assert_eq!(update.state.index, 1);
    }

    #[tokio::test]
    async fn failure_keeps_model_and_schedules_error() {
        let pipeline = Pipeline::new(Arc::new(NoopDriver));
        let model = Model::default();
        let update = pipeline.reduce(
            &model,
            Message::Custom {
                name: "unknown".into(),
                payload: serde_json::Value::Null,
            },
        );
        assert_eq!(update.state, model);
        match update.command.expect("error command").await {
            Message::Error { error } => assert!(error.is(&ErrorKind::UnhandledMessage)),
            other => panic!("Expected Error, got {:?}", other),
        }
    }
}
