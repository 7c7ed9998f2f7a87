use anyhow::{Context, Result};
use futures::FutureExt;
use futures::future::BoxFuture;
use k8s_openapi::api::core::v1::{Namespace, Pod};
use kube::api::ListParams;
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::core::Status;
use kube::{Api, Client, Config, ResourceExt};
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use std::future::Future;
use std::path::Path;
use tracing::debug;

use crate::error::FetchError;
use crate::gateway::ResourceGateway;
use crate::model::{ParentKey, ResourceRef};

/// Authenticated cluster handle built once at startup.
#[derive(Clone)]
pub struct KubeSession {
    client: Client,
    context: String,
    cluster: String,
}

impl KubeSession {
    pub async fn connect(kubeconfig_path: &Path, context: Option<String>) -> Result<Self> {
        let kubeconfig = Kubeconfig::read_from(kubeconfig_path).with_context(|| {
            format!("failed to read kubeconfig {}", kubeconfig_path.display())
        })?;

        let active_context = context
            .clone()
            .or_else(|| kubeconfig.current_context.clone())
            .unwrap_or_else(|| "-".to_string());
        let options = KubeConfigOptions {
            context,
            cluster: None,
            user: None,
        };
        let config = Config::from_custom_kubeconfig(kubeconfig, &options)
            .await
            .context("failed to build Kubernetes configuration from kubeconfig")?;

        let cluster = config.cluster_url.to_string();
        let client = Client::try_from(config).context("failed to initialize Kubernetes client")?;

        Ok(Self {
            client,
            context: active_context,
            cluster,
        })
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn cluster(&self) -> &str {
        &self.cluster
    }

    pub fn namespaces(&self, page_size: u32) -> NamespaceGateway {
        NamespaceGateway {
            client: self.client.clone(),
            page_size,
        }
    }

    pub fn pods(&self, page_size: u32) -> PodGateway {
        PodGateway {
            client: self.client.clone(),
            page_size,
        }
    }
}

/// Lists cluster namespaces. Only answers the root key.
#[derive(Clone)]
pub struct NamespaceGateway {
    client: Client,
    page_size: u32,
}

impl ResourceGateway for NamespaceGateway {
    fn list(&self, parent: &ParentKey) -> BoxFuture<'static, Result<Vec<ResourceRef>, FetchError>> {
        list_namespaces(self.client.clone(), self.page_size, parent.clone()).boxed()
    }
}

async fn list_namespaces(
    client: Client,
    page_size: u32,
    parent: ParentKey,
) -> Result<Vec<ResourceRef>, FetchError> {
    if !parent.is_root() {
        return Err(FetchError::Rejected(format!(
            "namespaces are cluster scoped, got parent {parent}"
        )));
    }

    let namespaces: Api<Namespace> = Api::all(client);
    let items = list_all(&namespaces, page_size)
        .await
        .map_err(|error| fetch_error(error, "namespaces"))?;
    debug!("listed {} namespaces", items.len());
    Ok(items
        .into_iter()
        .map(|namespace| ResourceRef::root(namespace.name_any()))
        .collect())
}

/// Lists the pods of the namespace named by the parent key.
#[derive(Clone)]
pub struct PodGateway {
    client: Client,
    page_size: u32,
}

impl ResourceGateway for PodGateway {
    fn list(&self, parent: &ParentKey) -> BoxFuture<'static, Result<Vec<ResourceRef>, FetchError>> {
        list_pods(self.client.clone(), self.page_size, parent.clone()).boxed()
    }
}

async fn list_pods(
    client: Client,
    page_size: u32,
    parent: ParentKey,
) -> Result<Vec<ResourceRef>, FetchError> {
    let namespace = namespace_target(&parent)?;

    // Listing pods of a missing namespace succeeds with zero items, so
    // existence is checked first to keep "gone" distinct from "empty".
    let namespaces: Api<Namespace> = Api::all(client.clone());
    let found = namespaces
        .get_opt(&namespace)
        .await
        .map_err(|error| fetch_error(error, &namespace))?;
    if found.is_none() {
        return Err(FetchError::NotFound { parent: namespace });
    }

    let pods: Api<Pod> = Api::namespaced(client, &namespace);
    let items = list_all(&pods, page_size)
        .await
        .map_err(|error| fetch_error(error, &namespace))?;
    debug!("listed {} pods in {namespace}", items.len());
    Ok(items
        .into_iter()
        .map(|pod| ResourceRef::new(pod.name_any(), parent.clone()))
        .collect())
}

/// Lists every object, following continue tokens `page_size` items at a time.
async fn list_all<K>(api: &Api<K>, page_size: u32) -> Result<Vec<K>, kube::Error>
where
    K: Clone + DeserializeOwned + Debug,
{
    collect_pages(|token| {
        let mut params = ListParams::default().limit(page_size);
        if let Some(token) = &token {
            params = params.continue_token(token);
        }
        async move {
            api.list(&params)
                .await
                .map(|list| (list.items, list.metadata.continue_))
        }
    })
    .await
}

async fn collect_pages<T, E, F, Fut>(mut fetch_page: F) -> Result<Vec<T>, E>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<(Vec<T>, Option<String>), E>>,
{
    let mut items = Vec::new();
    let mut token = None;
    loop {
        let (page, next) = fetch_page(token.take()).await?;
        items.extend(page);
        match next.filter(|next| !next.is_empty()) {
            Some(next) => token = Some(next),
            None => return Ok(items),
        }
    }
}

/// Classifies a client error for the panel listing children of `target`.
fn fetch_error(error: kube::Error, target: &str) -> FetchError {
    match error {
        kube::Error::Api(status) => {
            let reason = status_reason(&status);
            match status.code {
                401 | 403 => FetchError::Unauthorized(reason),
                404 => FetchError::NotFound {
                    parent: target.to_string(),
                },
                _ => FetchError::Rejected(reason),
            }
        }
        kube::Error::Auth(error) => FetchError::Unauthorized(error.to_string()),
        other => FetchError::Unreachable(other.to_string()),
    }
}

fn status_reason(status: &Status) -> String {
    if !status.message.trim().is_empty() {
        status.message.trim().to_string()
    } else if !status.reason.trim().is_empty() {
        status.reason.trim().to_string()
    } else {
        format!("HTTP {}", status.code)
    }
}

fn namespace_target(parent: &ParentKey) -> Result<String, FetchError> {
    match parent {
        ParentKey::Resource(namespace) if !namespace.trim().is_empty() => {
            Ok(namespace.trim().to_string())
        }
        _ => Err(FetchError::Rejected(
            "pods can only be listed for a selected namespace".to_string(),
        )),
    }
}
