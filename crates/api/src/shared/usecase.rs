use futures::future::join_all;
use medremind_infra::MedRemindContext;
use std::fmt::Debug;
use tracing::error;

/// Subscriber is a side effect to a `UseCase`
///
/// It is going to act upon the response of the execution
/// of the `UseCase` if the execution was a success.
#[async_trait::async_trait(?Send)]
pub trait Subscriber<U: UseCase> {
    async fn notify(&self, e: &U::Response, ctx: &MedRemindContext);
}

#[async_trait::async_trait(?Send)]
pub trait UseCase: Debug {
    type Response;
    type Error;

    const NAME: &'static str;

    async fn execute(&mut self, ctx: &MedRemindContext) -> Result<Self::Response, Self::Error>;

    fn subscribers() -> Vec<Box<dyn Subscriber<Self>>> {
        Default::default()
    }
}

#[tracing::instrument(name = "Executing usecase", skip(usecase, ctx), fields(usecase = U::NAME))]
pub async fn execute<U>(mut usecase: U, ctx: &MedRemindContext) -> Result<U::Response, U::Error>
where
    U: UseCase,
    U::Error: Debug,
{
    let res = usecase.execute(ctx).await;

    match &res {
        Ok(res) => {
            let subscribers = U::subscribers();
            let mut subscriber_promises = Vec::with_capacity(subscribers.len());
            for subscriber in &subscribers {
                subscriber_promises.push(subscriber.notify(res, ctx));
            }
            join_all(subscriber_promises).await;
        }
        Err(e) => {
            error!("Use case error: {:?}", e);
        }
    }

    res
}
