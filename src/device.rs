use uuid::Uuid;

/// Source of the opaque device identifiers sent as `X-FaceApp-DeviceID`.
pub trait DeviceIdGenerator: Send + Sync {
    fn generate_device_id(&self) -> String;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RandomDeviceId;

impl DeviceIdGenerator for RandomDeviceId {
    fn generate_device_id(&self) -> String {
        Uuid::new_v4().simple().to_string()
    }
}

pub fn generate_device_id() -> String {
    RandomDeviceId.generate_device_id()
}
