//! CLI command implementations

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::Context;
use plait_changeset::pending_changes;
use plait_copypaste::{copy_full, paste, PasteMode};
use plait_core::{default_language, ModelStore, NodeId, Ownership, SchemaOwnership, Snapshot};
use serde_json::json;

pub fn inspect(path: &Path) -> anyhow::Result<()> {
    let store = load(path)?;

    let mut types: BTreeMap<String, usize> = BTreeMap::new();
    for (_, node) in store.iter() {
        *types.entry(node.element_type().to_string()).or_default() += 1;
    }
    let pending = pending_changes(&store)?;

    let summary = json!({
        "elements": store.len(),
        "types": types,
        "pending_changes": pending,
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

pub fn compare(ancestor: &Path, current: &Path, incoming: &Path, output: Option<&Path>) -> anyhow::Result<()> {
    let ancestor = load(ancestor)?;
    let mut current_store = load(current)?;
    let incoming = load(incoming)?;

    let pending = plait_changeset::compare(&mut current_store, &ancestor, &incoming)
        .context("Cannot compare ancestor and incoming models")?;
    tracing::info!("Recorded {} changes in {}", pending.len(), current.display());

    if let Some(output) = output {
        let text = Snapshot::from_store(&current_store).to_json_pretty()?;
        fs::write(output, text).with_context(|| format!("Cannot write {}", output.display()))?;
        tracing::info!("Wrote {}", output.display());
    }

    println!("{}", serde_json::to_string_pretty(&pending)?);
    Ok(())
}

pub fn duplicate(path: &Path, diagram: u64, ids: &[u64], full: bool, closure: bool) -> anyhow::Result<()> {
    let mut store = load(path)?;

    let items: Vec<NodeId> = ids.iter().copied().map(NodeId).collect();
    let ownership = closure.then_some(&SchemaOwnership as &dyn Ownership);
    let data = copy_full(&store, &items, ownership).context("Cannot copy elements")?;

    let mode = if full { PasteMode::Full } else { PasteMode::Link };
    let pasted = paste(&data, &mut store, NodeId(diagram), mode, &mut ())
        .with_context(|| format!("Cannot paste onto diagram {}", diagram))?;
    tracing::info!("Pasted {} items onto diagram {}", pasted.len(), diagram);

    let result = json!({
        "pasted": pasted,
        "snapshot": Snapshot::from_store(&store),
    });
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

/// Read a snapshot document into a new store.
fn load(path: &Path) -> anyhow::Result<ModelStore> {
    let text = fs::read_to_string(path).with_context(|| format!("Cannot read {}", path.display()))?;
    let snapshot = Snapshot::from_json(&text).with_context(|| format!("Invalid snapshot {}", path.display()))?;
    let store = snapshot
        .into_store(&default_language())
        .with_context(|| format!("Cannot load {}", path.display()))?;
    tracing::debug!("Loaded {} elements from {}", store.len(), path.display());
    Ok(store)
}
