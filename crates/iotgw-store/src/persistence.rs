//! Sample persistence: position-to-column mapping onto the fixed table shapes
//!
//! Resource type selects the insert statement; the statement fixes the
//! expected arity and typing of the decoded sample. Sentinel filtering is
//! the observation pipeline's job - by the time a sample reaches this
//! module it is a real measurement.

use async_trait::async_trait;
use iotgw_core::{GatewayError, GatewayResult, ResourceType, SamplePersistence, SampleValue};

use crate::{db_err, Store};

/// Insert statement and expected sample arity for a resource type.
/// `movement` and unrecognized types have no table shape.
fn insert_statement(resource: ResourceType) -> Option<(&'static str, usize)> {
    match resource {
        ResourceType::TemperatureAndHumidity => Some((
            "INSERT INTO temphum_sensor (temperature, humidity) VALUES (?1, ?2)",
            2,
        )),
        ResourceType::Co => Some(("INSERT INTO co_sensor (co) VALUES (?1)", 1)),
        ResourceType::Hvac => Some(("INSERT INTO hvac_actuator (status) VALUES (?1)", 1)),
        ResourceType::Movement | ResourceType::Other => None,
    }
}

#[async_trait]
impl SamplePersistence for Store {
    async fn persist(&self, resource: ResourceType, sample: &[SampleValue]) -> GatewayResult<()> {
        let (statement, arity) = insert_statement(resource)
            .ok_or(GatewayError::UnsupportedResource(resource))?;

        if sample.len() != arity {
            return Err(GatewayError::ArityMismatch {
                resource,
                expected: arity,
                actual: sample.len(),
            });
        }

        // 1-indexed positional binding: element N fills column N
        let mut query = sqlx::query(statement);
        for value in sample {
            query = match value {
                SampleValue::Bool(b) => query.bind(*b),
                SampleValue::Number(n) => query.bind(*n),
            };
        }

        let result = query.execute(&self.pool).await.map_err(db_err)?;
        if result.rows_affected() == 0 {
            return Err(GatewayError::Storage(format!(
                "insert into {} table affected no rows",
                resource
            )));
        }
        Ok(())
    }
}
