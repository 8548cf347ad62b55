use anyhow::Result;
use reqwest::Client;

use taskgate::{Coordinator, CoordinatorConfig, ServiceAddress, WorkerConfig, WorkerProcessor};

pub struct CoordinatorState {
    pub coordinator: Coordinator,
    /// Used to reach workers outside the registry from `/test-worker`.
    pub address: ServiceAddress,
    pub client: Client,
}

impl CoordinatorState {
    pub fn new(config: CoordinatorConfig, address: ServiceAddress) -> Result<Self> {
        let client = Client::builder().build()?;
        let coordinator = Coordinator::with_client(config, client.clone());

        Ok(Self {
            coordinator,
            address,
            client,
        })
    }
}

pub struct WorkerState {
    pub processor: WorkerProcessor,
    pub client: Client,
}

impl WorkerState {
    pub fn new(config: WorkerConfig) -> Result<Self> {
        Ok(Self {
            processor: WorkerProcessor::new(config),
            client: Client::builder().build()?,
        })
    }
}
