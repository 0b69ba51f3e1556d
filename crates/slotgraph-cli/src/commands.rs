//! Subcommand execution
//!
//! Each command produces a JSON value and a success flag; `main` prints the
//! value and maps the flag to the exit code.

use anyhow::{bail, Context};
use clap::ArgMatches;
use serde_json::{json, Map, Value};
use slotgraph_core::{GraphConfig, InstantiateOptions, ObjectGraph};
use slotgraph_document::{DocId, Document, Location};
use slotgraph_store::{load_seed_file, reset_store, CachedStore, DocumentStore, MemoryStore};
use std::path::{Path, PathBuf};

/// Result of one command
#[derive(Debug)]
pub(crate) struct Outcome {
    pub(crate) output: Value,
    pub(crate) success: bool,
}

impl Outcome {
    fn ok(output: Value) -> Self {
        Self { output, success: true }
    }
}

/// Seeded store plus the engine over it
pub(crate) struct Session {
    memory: MemoryStore,
    graph: ObjectGraph<CachedStore<MemoryStore>>,
}

impl Session {
    /// Load configuration and seed set from disk
    pub(crate) async fn open(seed: &Path, config: Option<&Path>) -> anyhow::Result<Self> {
        let config = match config {
            Some(path) => GraphConfig::load(path)
                .await
                .with_context(|| format!("loading config {}", path.display()))?,
            None => GraphConfig::default(),
        };
        let docs = load_seed_file(seed)
            .await
            .with_context(|| format!("loading seed {}", seed.display()))?;
        Self::from_documents(&docs, config).await
    }

    pub(crate) async fn from_documents(docs: &[Document], config: GraphConfig) -> anyhow::Result<Self> {
        let memory = MemoryStore::new();
        let store = CachedStore::new(memory.clone(), config.cache_capacity);
        let stats = reset_store(&store, docs).await?;
        tracing::debug!(loaded = stats.loaded, "seed set loaded");
        Ok(Self {
            memory,
            graph: ObjectGraph::with_config(store, config),
        })
    }

    pub(crate) async fn execute(&self, matches: &ArgMatches) -> anyhow::Result<Outcome> {
        match matches.subcommand() {
            Some(("validate", _)) => self.validate().await,
            Some(("repair", args)) => {
                self.repair(args.get_one::<PathBuf>("out").map(PathBuf::as_path))
                    .await
            }
            Some(("chain", args)) => self.chain(&id_arg(args, "type")?).await,
            Some(("slots", args)) => self.slots(&id_arg(args, "type")?).await,
            Some(("instantiate", args)) => {
                let options = if args.get_flag("preview") {
                    InstantiateOptions::preview()
                } else {
                    InstantiateOptions::persist()
                };
                self.instantiate(&id_arg(args, "type")?, id_arg(args, "id")?, options)
                    .await
            }
            Some(("model", args)) => self.model(&id_arg(args, "id")?).await,
            Some(("expand", args)) => {
                let location = args.get_one::<String>("location").map(String::as_str);
                self.expand(&id_arg(args, "id")?, location).await
            }
            Some((other, _)) => bail!("unknown command {other}"),
            None => bail!("no command given"),
        }
    }

    async fn validate(&self) -> anyhow::Result<Outcome> {
        let headers = self.graph.store().list_doc_headers().await?;
        let mut instances = Map::new();
        for header in headers.iter().filter(|h| h.id.is_instance()) {
            let Some(doc) = self.graph.get_instance(&header.id).await else {
                continue;
            };
            let entries = self.graph.validate_instance(&doc).await?;
            if !entries.is_empty() {
                instances.insert(header.id.to_string(), serde_json::to_value(&entries)?);
            }
        }
        let links = self.graph.validate_parent_links().await?;

        let success = instances.is_empty() && links.is_empty();
        Ok(Outcome {
            output: json!({ "instances": instances, "links": links }),
            success,
        })
    }

    async fn repair(&self, out: Option<&Path>) -> anyhow::Result<Outcome> {
        let stats = self.graph.repair_parent_links().await?;
        let remaining = self.graph.validate_parent_links().await?;

        if let Some(path) = out {
            let rendered = serde_json::to_string_pretty(&self.memory.snapshot())?;
            tokio::fs::write(path, rendered)
                .await
                .with_context(|| format!("writing {}", path.display()))?;
            tracing::info!(path = %path.display(), "wrote repaired documents");
        }

        Ok(Outcome {
            success: stats.errors == 0 && remaining.is_empty(),
            output: json!({ "stats": stats, "remaining": remaining }),
        })
    }

    async fn chain(&self, type_id: &DocId) -> anyhow::Result<Outcome> {
        let chain = self.graph.resolve_chain(type_id).await;
        Ok(Outcome {
            success: !chain.is_empty(),
            output: json!({ "chain": chain.ids(), "truncated": chain.is_truncated() }),
        })
    }

    async fn slots(&self, type_id: &DocId) -> anyhow::Result<Outcome> {
        let slots = self.graph.effective_slots(type_id).await;
        Ok(Outcome::ok(serde_json::to_value(&slots)?))
    }

    async fn instantiate(
        &self,
        type_id: &DocId,
        id: DocId,
        options: InstantiateOptions,
    ) -> anyhow::Result<Outcome> {
        let tree = self
            .graph
            .create_instance_from_type(id, type_id, Map::new(), options)
            .await?;
        Ok(Outcome::ok(json!({
            "preview": tree.is_preview(),
            "root": tree.root(),
            "children": tree.children(),
        })))
    }

    async fn model(&self, id: &DocId) -> anyhow::Result<Outcome> {
        Ok(match self.graph.effective_model_by_id(id).await {
            Some(model) => Outcome::ok(serde_json::to_value(model)?),
            None => Outcome {
                output: Value::Null,
                success: false,
            },
        })
    }

    async fn expand(&self, id: &DocId, location: Option<&str>) -> anyhow::Result<Outcome> {
        let location = location
            .map(str::parse::<Location>)
            .transpose()
            .context("invalid --location")?;
        let Some(placements) = self.graph.expand_by_id(id, location).await else {
            bail!("document {id} not found");
        };
        Ok(Outcome::ok(serde_json::to_value(placements)?))
    }
}

fn id_arg(args: &ArgMatches, name: &str) -> anyhow::Result<DocId> {
    args.get_one::<String>(name)
        .map(|raw| DocId::new(raw.as_str()))
        .with_context(|| format!("missing <{name}>"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use slotgraph_test_utils::{door_catalog, instance_doc, linked_to, with_parts};
    use std::io::Write;

    async fn session(extra: Vec<Document>) -> Session {
        let mut docs = door_catalog();
        docs.extend(extra);
        Session::from_documents(&docs, GraphConfig::default()).await.unwrap()
    }

    #[tokio::test]
    async fn validate_flags_broken_links() {
        let session = session(vec![linked_to(instance_doc("f", "frame"), "gone", "children.frame")]).await;
        let outcome = session.validate().await.unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.output["links"][0]["kind"], json!("missing_parent"));
    }

    #[tokio::test]
    async fn repair_writes_snapshot() {
        let session = session(vec![linked_to(instance_doc("f", "frame"), "gone", "children.frame")]).await;
        let out = tempfile::NamedTempFile::new().unwrap();

        let outcome = session.repair(Some(out.path())).await.unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.output["stats"]["orphaned"], json!(1));

        let written: Vec<Document> =
            serde_json::from_str(&std::fs::read_to_string(out.path()).unwrap()).unwrap();
        let frame = written.iter().find(|d| d.id == DocId::instance_id("f")).unwrap();
        assert!(frame.parent.is_none());
    }

    #[tokio::test]
    async fn chain_and_slots() {
        let session = session(Vec::new()).await;
        let chain = session.chain(&DocId::type_id("frame")).await.unwrap();
        assert_eq!(chain.output["chain"], json!(["type:part", "type:frame"]));

        let slots = session.slots(&DocId::type_id("door")).await.unwrap();
        assert_eq!(slots.output["children"]["panels"]["array"], json!(true));
    }

    #[tokio::test]
    async fn instantiate_then_model() {
        let session = session(Vec::new()).await;
        let outcome = session
            .instantiate(&DocId::type_id("door"), DocId::instance_id("d"), InstantiateOptions::persist())
            .await
            .unwrap();
        assert_eq!(outcome.output["children"].as_array().map(Vec::len), Some(3));

        let model = session.model(&DocId::instance_id("d")).await.unwrap();
        assert_eq!(model.output["url"], json!("door.glb"));
        assert!(!session.model(&DocId::instance_id("nope")).await.unwrap().success);
    }

    #[tokio::test]
    async fn expand_with_location() {
        let session = session(vec![
            with_parts(instance_doc("kit", "asm"), &[("inst:f", "0 0 1")]),
            instance_doc("f", "frame"),
        ])
        .await;
        let outcome = session.expand(&DocId::instance_id("kit"), Some("2 0 0")).await.unwrap();
        let placed: Location = outcome.output[0]["location"].as_str().unwrap().parse().unwrap();
        assert!(placed.approx_eq(&"2 0 1".parse().unwrap(), 1e-9));
        assert!(session.expand(&DocId::instance_id("kit"), Some("x")).await.is_err());
    }

    #[tokio::test]
    async fn opens_seed_and_config_files() {
        let mut seed = tempfile::NamedTempFile::new().unwrap();
        write!(seed, "{}", serde_json::to_string(&door_catalog()).unwrap()).unwrap();
        let mut config = tempfile::NamedTempFile::new().unwrap();
        writeln!(config, "max_type_depth = 0").unwrap();

        let session = Session::open(seed.path(), Some(config.path())).await.unwrap();
        let chain = session.chain(&DocId::type_id("frame")).await.unwrap();
        assert_eq!(chain.output["chain"], json!(["type:frame"]));
    }
}
