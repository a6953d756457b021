use pipeline_env_core::env_file::StoreParameter;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterPage {
    pub parameters: Vec<StoreParameter>,
    pub next_token: Option<String>,
}

/// One page of a recursive, decrypted lookup under `path`.
pub trait ParameterStore {
    fn parameters_page(
        &self,
        path: &str,
        next_token: Option<&str>,
    ) -> Result<ParameterPage, String>;
}

/// Follows continuation tokens until the store reports no further pages.
/// Parameters are returned in store order.
pub fn fetch_parameters_by_path(
    store: &dyn ParameterStore,
    path: &str,
) -> Result<Vec<StoreParameter>, String> {
    let mut parameters = Vec::new();
    let mut next_token: Option<String> = None;

    loop {
        let page = store.parameters_page(path, next_token.as_deref())?;
        parameters.extend(page.parameters);

        match page.next_token.filter(|token| !token.is_empty()) {
            Some(token) if next_token.as_deref() == Some(token.as_str()) => {
                return Err(format!(
                    "parameter store returned the same continuation token twice for path {path}"
                ));
            }
            Some(token) => next_token = Some(token),
            None => return Ok(parameters),
        }
    }
}
