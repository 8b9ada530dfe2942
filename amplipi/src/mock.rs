use crate::client::MockDeviceApi;
use crate::models::{Group, GroupId, Status};

/// Builds a `MockDeviceApi` that serves one fixed status and accepts every update.
pub struct MockDeviceApiBuilder {
    status: Status,
}

impl MockDeviceApiBuilder {
    pub fn new() -> Self {
        Self {
            status: Status::default(),
        }
    }

    pub fn status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    pub fn build(self) -> MockDeviceApi {
        let mut api = MockDeviceApi::new();
        let status = self.status;

        let reply = status.clone();
        api.expect_status().returning(move || Ok(reply.clone()));
        let reply = status.clone();
        api.expect_update_zone()
            .returning(move |_, _| Ok(reply.clone()));
        let reply = status.clone();
        api.expect_update_zones()
            .returning(move |_| Ok(reply.clone()));
        let reply = status.clone();
        api.expect_update_group()
            .returning(move |_, _| Ok(reply.clone()));
        api.expect_create_group().returning(|create| {
            Ok(Group {
                id: GroupId(100),
                name: create.name.clone(),
                source_id: None,
                zones: create.zones.clone(),
                vol_f: None,
                mute: None,
            })
        });
        api.expect_delete_group()
            .returning(move |_| Ok(status.clone()));

        api
    }
}

impl Default for MockDeviceApiBuilder {
    fn default() -> Self {
        Self::new()
    }
}
