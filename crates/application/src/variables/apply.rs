//! Applying variables to environments and requests

use courier_domain::{Environment, KeyValue, ProtocolSpec};
use indexmap::IndexMap;

use super::parser::replace_placeholders;

/// Substitutes `globals` into every value of `env`, in place.
pub fn apply_to_env(globals: &IndexMap<String, String>, env: &mut Environment) {
    for kv in &mut env.values {
        kv.value = replace_placeholders(&kv.value, |name| globals.get(name).map(String::as_str));
    }
}

/// The lookup used for one dispatch: enabled environment values first, then globals.
#[derive(Debug, Clone, Default)]
pub struct Substitution {
    env: IndexMap<String, String>,
    globals: IndexMap<String, String>,
}

impl Substitution {
    /// Builds the lookup, resolving the environment against the globals first.
    ///
    /// `env` is a working copy; the stored environment is never touched.
    #[must_use]
    pub fn new(globals: IndexMap<String, String>, env: Option<Environment>) -> Self {
        let env = env
            .map(|mut env| {
                apply_to_env(&globals, &mut env);
                let mut values = IndexMap::new();
                for kv in env.values.into_iter().filter(|kv| kv.enabled) {
                    // First enabled entry wins, matching `Environment::get`.
                    values.entry(kv.key).or_insert(kv.value);
                }
                values
            })
            .unwrap_or_default();
        Self { env, globals }
    }

    /// Value bound to `name`, if any.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&str> {
        self.env
            .get(name)
            .or_else(|| self.globals.get(name))
            .map(String::as_str)
    }

    /// Substitutes known names into `input`; unknown placeholders stay verbatim.
    #[must_use]
    pub fn apply(&self, input: &str) -> String {
        replace_placeholders(input, |name| self.lookup(name))
    }

    fn apply_values(&self, items: &mut [KeyValue]) {
        for kv in items {
            kv.value = self.apply(&kv.value);
        }
    }

    /// Substitutes into every eligible field of a request spec.
    pub fn apply_to_request(&self, spec: &mut ProtocolSpec) {
        match spec {
            ProtocolSpec::Http(http) => {
                http.url = self.apply(&http.url);
                self.apply_values(&mut http.headers);
                self.apply_values(&mut http.query_params);
                self.apply_values(&mut http.path_params);
                http.body.map_text(|text| self.apply(text));
            }
            ProtocolSpec::GraphQl(gql) => {
                gql.url = self.apply(&gql.url);
                self.apply_values(&mut gql.headers);
                gql.query = self.apply(&gql.query);
                gql.variables = self.apply(&gql.variables);
            }
            ProtocolSpec::Grpc(grpc) => {
                grpc.address = self.apply(&grpc.address);
                self.apply_values(&mut grpc.metadata);
                grpc.body = self.apply(&grpc.body);
            }
        }
        spec.auth_mut().map_fields(|field| self.apply(field));
    }
}
