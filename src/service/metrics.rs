//! Prometheus metrics for sent replies.

use std::net::{Ipv4Addr, SocketAddr};

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::base::types::Res;

/// Install the Prometheus recorder with an HTTP exposition listener.
pub fn serve(port: u16) -> Res<()> {
    PrometheusBuilder::new().with_http_listener(SocketAddr::from((Ipv4Addr::UNSPECIFIED, port))).install()?;

    Ok(())
}

/// Count one successfully composed-and-sent reply.
pub fn count_message_sent(channel_id: &str) {
    metrics::counter!("linkbot_messages_sent", "channel" => channel_id.to_string()).increment(1);
}
