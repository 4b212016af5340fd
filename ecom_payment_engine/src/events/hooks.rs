use std::sync::Arc;

use futures_util::future::BoxFuture;

use crate::events::{
    EventHandler,
    EventProducer,
    Handler,
    OrderCancelledEvent,
    OrdersCreatedEvent,
    PaymentSucceededEvent,
};

/// The publishing ends of the installed hooks. APIs hold a copy of this, and publish to every producer in the list
/// for the event type. An empty list means nobody is listening.
#[derive(Default, Clone)]
pub struct EventProducers {
    pub orders_created_producer: Vec<EventProducer<OrdersCreatedEvent>>,
    pub payment_succeeded_producer: Vec<EventProducer<PaymentSucceededEvent>>,
    pub order_cancelled_producer: Vec<EventProducer<OrderCancelledEvent>>,
}

impl EventProducers {
    pub async fn publish_orders_created(&self, event: OrdersCreatedEvent) {
        for producer in &self.orders_created_producer {
            producer.publish_event(event.clone()).await;
        }
    }

    pub async fn publish_payment_succeeded(&self, event: PaymentSucceededEvent) {
        for producer in &self.payment_succeeded_producer {
            producer.publish_event(event.clone()).await;
        }
    }

    pub async fn publish_order_cancelled(&self, event: OrderCancelledEvent) {
        for producer in &self.order_cancelled_producer {
            producer.publish_event(event.clone()).await;
        }
    }
}

pub struct EventHandlers {
    pub on_orders_created: Option<EventHandler<OrdersCreatedEvent>>,
    pub on_payment_succeeded: Option<EventHandler<PaymentSucceededEvent>>,
    pub on_order_cancelled: Option<EventHandler<OrderCancelledEvent>>,
}

impl EventHandlers {
    pub fn new(buffer_size: usize, hooks: EventHooks) -> Self {
        let on_orders_created = hooks.on_orders_created.map(|f| EventHandler::new(buffer_size, f));
        let on_payment_succeeded = hooks.on_payment_succeeded.map(|f| EventHandler::new(buffer_size, f));
        let on_order_cancelled = hooks.on_order_cancelled.map(|f| EventHandler::new(buffer_size, f));
        Self { on_orders_created, on_payment_succeeded, on_order_cancelled }
    }

    pub fn producers(&self) -> EventProducers {
        let mut result = EventProducers::default();
        if let Some(handler) = &self.on_orders_created {
            result.orders_created_producer.push(handler.subscribe());
        }
        if let Some(handler) = &self.on_payment_succeeded {
            result.payment_succeeded_producer.push(handler.subscribe());
        }
        if let Some(handler) = &self.on_order_cancelled {
            result.order_cancelled_producer.push(handler.subscribe());
        }
        result
    }

    /// Spawns a task for every installed handler. The tasks end once all the producers have been dropped.
    pub async fn start_handlers(self) {
        if let Some(handler) = self.on_orders_created {
            tokio::spawn(handler.start_handler());
        }
        if let Some(handler) = self.on_payment_succeeded {
            tokio::spawn(handler.start_handler());
        }
        if let Some(handler) = self.on_order_cancelled {
            tokio::spawn(handler.start_handler());
        }
    }
}

#[derive(Default, Clone)]
pub struct EventHooks {
    pub on_orders_created: Option<Handler<OrdersCreatedEvent>>,
    pub on_payment_succeeded: Option<Handler<PaymentSucceededEvent>>,
    pub on_order_cancelled: Option<Handler<OrderCancelledEvent>>,
}

impl EventHooks {
    pub fn on_orders_created<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(OrdersCreatedEvent) -> BoxFuture<'static, ()>) + Send + Sync + 'static {
        self.on_orders_created = Some(Arc::new(f));
        self
    }

    pub fn on_payment_succeeded<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(PaymentSucceededEvent) -> BoxFuture<'static, ()>) + Send + Sync + 'static {
        self.on_payment_succeeded = Some(Arc::new(f));
        self
    }

    pub fn on_order_cancelled<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(OrderCancelledEvent) -> BoxFuture<'static, ()>) + Send + Sync + 'static {
        self.on_order_cancelled = Some(Arc::new(f));
        self
    }
}
