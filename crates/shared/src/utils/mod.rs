mod logs;
mod metrics;
mod otel;
mod random_string;
mod shutdown;
mod template;

pub use self::logs::init_logger;
pub use self::metrics::{Method, Metrics, Status};
pub use self::otel::{ServiceTelemetry, Telemetry, TracingContext};
pub use self::random_string::{generate_order_number, generate_random_string};
pub use self::shutdown::shutdown_signal;
pub use self::template::{
    ContactEmailTemplate, OrderEmail, OrderEmailLine, format_euro, render_admin_order_email,
    render_contact_email, render_customer_order_email,
};
