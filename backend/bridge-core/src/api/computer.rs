use crate::error::CallError;
use crate::session::BridgeClient;

use serde_json::Value;

/// `computer.*`: read-only host information.
pub struct Computer<'a> {
    pub(super) client: &'a BridgeClient,
}

impl Computer<'_> {
    pub async fn get_memory_info(&self) -> Result<Value, CallError> {
        self.client.call("computer.getMemoryInfo", Value::Null).await
    }

    pub async fn get_arch(&self) -> Result<String, CallError> {
        self.client.call_as("computer.getArch", Value::Null).await
    }

    pub async fn get_kernel_info(&self) -> Result<Value, CallError> {
        self.client.call("computer.getKernelInfo", Value::Null).await
    }

    pub async fn get_os_info(&self) -> Result<Value, CallError> {
        self.client.call("computer.getOSInfo", Value::Null).await
    }

    pub async fn get_cpu_info(&self) -> Result<Value, CallError> {
        self.client.call("computer.getCPUInfo", Value::Null).await
    }

    pub async fn get_displays(&self) -> Result<Vec<Value>, CallError> {
        self.client.call_as("computer.getDisplays", Value::Null).await
    }

    pub async fn get_mouse_position(&self) -> Result<Value, CallError> {
        self.client
            .call("computer.getMousePosition", Value::Null)
            .await
    }
}
