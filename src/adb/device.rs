use crate::adb::client::AdbClient;
use crate::core::{AdbError, Result};
use std::collections::HashMap;
#[derive(Debug, Clone)]
pub struct Device {
    pub serial: String,
    pub model: Option<String>,
    pub brand: Option<String>,
    pub marketing_name: Option<String>,
    pub android_version: Option<String>,
}
impl Device {
    pub fn display_name(&self) -> String {
        if let Some(brand) = &self.brand {
            if let Some(name) = &self.marketing_name {
                return format!("{} {}", brand, name).trim().to_string();
            }
        }
        if let Some(model) = &self.model {
            return model.clone();
        }
        self.serial.clone()
    }
}
pub struct DeviceManager {
    client: AdbClient,
}
impl DeviceManager {
    pub fn new(client: AdbClient) -> Self {
        Self { client }
    }
    /// Authorised devices only; `unauthorized` and `offline` entries are dropped.
    pub async fn list_devices(&self) -> Result<Vec<Device>> {
        let (output, _) = self.client.execute(&["devices", "-l"]).await?;
        let mut devices = Vec::new();
        for serial in parse_device_serials(&output) {
            let props = self.get_properties(&serial).await.unwrap_or_default();
            let model = props.get("ro.product.model").cloned();
            let brand = props.get("ro.product.brand").cloned();
            let marketing_name = Self::first_non_empty(&[
                props.get("ro.product.marketname").cloned(),
                props.get("ro.config.marketing_name").cloned(),
                props.get("ro.product.vendor.model").cloned(),
            ]);
            let android_version = props.get("ro.build.version.release").cloned();
            devices.push(Device {
                serial,
                model,
                brand,
                marketing_name,
                android_version,
            });
        }
        Ok(devices)
    }
    pub async fn find(&self, serial: &str) -> Result<Device> {
        self.list_devices()
            .await?
            .into_iter()
            .find(|d| d.serial == serial)
            .ok_or_else(|| AdbError::DeviceNotFound(serial.to_string()))
    }
    pub async fn get_properties(&self, serial: &str) -> Result<HashMap<String, String>> {
        let output = self.client.shell(serial, &["getprop"]).await?;
        Ok(parse_getprop(&output))
    }
    fn first_non_empty(values: &[Option<String>]) -> Option<String> {
        values
            .iter()
            .find(|v| v.as_ref().map(|s| !s.is_empty()).unwrap_or(false))
            .and_then(|v| v.clone())
    }
}
fn parse_device_serials(output: &str) -> Vec<String> {
    output
        .lines()
        .skip(1)
        .filter_map(|line| {
            let line = line.trim();
            if line.is_empty() || line.starts_with('*') {
                return None;
            }
            let mut parts = line.split_whitespace();
            let serial = parts.next()?;
            match parts.next() {
                Some("device") => Some(serial.to_string()),
                _ => None,
            }
        })
        .collect()
}
fn parse_getprop(output: &str) -> HashMap<String, String> {
    let mut props = HashMap::new();
    for line in output.lines() {
        let line = line.trim();
        if !line.starts_with('[') {
            continue;
        }
        if let Some(idx) = line.find("]: [") {
            let key = &line[1..idx];
            let rest = &line[idx + 4..];
            if let Some(end) = rest.rfind(']') {
                props.insert(key.to_string(), rest[..end].to_string());
            }
        }
    }
    props
}
