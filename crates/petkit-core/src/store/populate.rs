// ── Registry population ──
//
// One pass runs these steps strictly in order:
//
//   1. account snapshot (fetched only when not cached; seeds pets)
//   2. detail pass, one `{code}/owndevices` call per type code
//   3. prune entities missing from the account snapshot
//   4. phase A: records, media list, live feed
//      phase B: statistics
//      phase C: pet-activity graph (litter boxes)
//
// Fetches inside a step run concurrently. Only the account fetch is fatal;
// every other failure is logged and skipped.

use std::collections::{BTreeMap, HashSet};
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::Ordering;

use chrono::{Local, Utc};
use futures_util::future::join_all;
use serde_json::Value;
use tracing::{debug, info, warn};

use petkit_api::ApiClient;
use petkit_api::models::{DeviceStub, Family};

use super::DeviceRegistry;
use crate::convert;
use crate::error::CoreError;
use crate::model::device_type::has_camera;
use crate::model::{AuxUpdate, DeviceId, DeviceKind, LiveFeed, classify};

/// A physical device due for auxiliary fetches.
struct AuxTarget {
    id: DeviceId,
    code: String,
    kind: DeviceKind,
}

impl DeviceRegistry {
    /// Run a population pass.
    ///
    /// A caller that arrives while another pass is in flight waits for it
    /// and returns without starting a second one.
    pub async fn populate(&self, api: &ApiClient) -> Result<(), CoreError> {
        let seen = self.generation();
        let _guard = self.populate_lock.lock().await;
        if self.generation() != seen {
            debug!("population completed while waiting, reusing result");
            return Ok(());
        }
        self.complete_pass(api).await
    }

    /// Refetch the account snapshot and run a full pass.
    ///
    /// Never coalesces with an in-flight pass: that pass may have used the
    /// stale snapshot, so this one always runs after it.
    pub async fn refresh(&self, api: &ApiClient) -> Result<(), CoreError> {
        let _guard = self.populate_lock.lock().await;
        self.clear_account().await;
        self.complete_pass(api).await
    }

    async fn complete_pass(&self, api: &ApiClient) -> Result<(), CoreError> {
        self.run_pass(api).await?;

        self.generation.fetch_add(1, Ordering::AcqRel);
        self.last_populated.send_replace(Some(Utc::now()));
        info!(
            entities = self.devices.len(),
            generation = self.generation(),
            "registry populated"
        );
        Ok(())
    }

    async fn run_pass(&self, api: &ApiClient) -> Result<(), CoreError> {
        let families = self.load_account(api).await?;

        let stubs: Vec<(&DeviceStub, &'static str)> = families
            .iter()
            .flat_map(|f| f.device_list.iter())
            .map(|s| (s, classify(&s.device_type, &s.device_name)))
            .collect();

        for (stub, code) in &stubs {
            if !self.devices.contains(stub.device_id) {
                self.devices
                    .upsert(stub.device_id, convert::device_from_stub(stub, code));
            }
        }

        self.detail_pass(api, &stubs).await;
        self.prune(&families);
        self.aux_pass(api).await;
        Ok(())
    }

    // ── Step 1: account ──────────────────────────────────────────────

    async fn load_account(&self, api: &ApiClient) -> Result<Arc<Vec<Family>>, CoreError> {
        if let Some(cached) = self.account.read().await.clone() {
            return Ok(cached);
        }

        let families = Arc::new(api.family_list().await?);
        debug!(families = families.len(), "account snapshot fetched");
        self.seed_pets(api, &families).await;
        *self.account.write().await = Some(Arc::clone(&families));
        Ok(families)
    }

    async fn seed_pets(&self, api: &ApiClient, families: &[Family]) {
        let mut pet_ids = Vec::new();
        for family in families {
            for stub in &family.pet_list {
                let pet = convert::pet_from_stub(stub, family.group_id);
                self.devices.upsert(pet.id, pet);
                pet_ids.push(stub.pet_id);
            }
        }

        let futs = pet_ids.into_iter().map(|pet_id| async move {
            match api.pet_detail(pet_id).await {
                Ok(profile) => Some((pet_id, profile)),
                Err(e) => {
                    warn!(pet_id, error = %e, "pet profile fetch failed");
                    None
                }
            }
        });
        for (pet_id, profile) in join_all(futs).await.into_iter().flatten() {
            self.devices
                .update(pet_id, |pet| merge_profile(&mut pet.raw, profile));
        }
    }

    // ── Step 2: detail pass ──────────────────────────────────────────

    async fn detail_pass(&self, api: &ApiClient, stubs: &[(&DeviceStub, &'static str)]) {
        let mut by_code: BTreeMap<&'static str, Vec<&DeviceStub>> = BTreeMap::new();
        for &(stub, code) in stubs {
            by_code.entry(code).or_default().push(stub);
        }

        let futs = by_code.iter().map(|(code, group)| async move {
            match api.device_details(code).await {
                Ok(records) => Some((*code, group, records)),
                Err(e) => {
                    warn!(code, error = %e, "device detail fetch failed");
                    None
                }
            }
        });

        for (code, group, records) in join_all(futs).await.into_iter().flatten() {
            for raw in records {
                let Some(id) = convert::detail_id(&raw) else {
                    debug!(code, "detail record without id, skipping");
                    continue;
                };
                let Some(stub) = group.iter().find(|s| s.device_id == id) else {
                    debug!(code, device_id = id, "detail record not on account, skipping");
                    continue;
                };

                let mut device = convert::device_from_detail(stub, code, raw);
                if let Some(previous) = self.devices.get(id) {
                    device.keep_aux_from(&previous);
                }
                self.devices.upsert(id, device);
            }
        }
    }

    // ── Step 3: prune ────────────────────────────────────────────────

    fn prune(&self, families: &[Family]) {
        let keep: HashSet<DeviceId> = families
            .iter()
            .flat_map(|f| {
                f.device_list
                    .iter()
                    .map(|d| d.device_id)
                    .chain(f.pet_list.iter().map(|p| p.pet_id))
            })
            .collect();

        for id in self.devices.ids() {
            if !keep.contains(&id) {
                self.devices.remove(id);
                debug!(device_id = id, "pruned entity no longer on account");
            }
        }
    }

    // ── Step 4: auxiliary data ───────────────────────────────────────

    async fn aux_pass(&self, api: &ApiClient) {
        let today = Local::now().format("%Y%m%d").to_string();
        let targets: Vec<AuxTarget> = self
            .devices()
            .iter()
            .filter(|d| d.kind.is_physical())
            .filter_map(|d| {
                Some(AuxTarget {
                    id: d.id,
                    code: d.type_code()?.to_owned(),
                    kind: d.kind,
                })
            })
            .collect();
        let cameras: Vec<&AuxTarget> = targets.iter().filter(|t| has_camera(&t.code)).collect();

        // Phase A
        let (records, media, live) = tokio::join!(
            join_all(targets.iter().map(|t| fetch_aux(
                t.id,
                "records",
                api.device_records(&t.code, t.id, &today),
                AuxUpdate::Records,
            ))),
            join_all(cameras.iter().map(|t| fetch_aux(
                t.id,
                "media",
                api.media_list(&t.code, t.id),
                AuxUpdate::Media,
            ))),
            join_all(cameras.iter().map(|t| fetch_aux(
                t.id,
                "live_feed",
                api.live_feed(&t.code, t.id),
                |v| AuxUpdate::LiveFeed(LiveFeed::from_payload(v)),
            ))),
        );
        self.apply_aux(records.into_iter().chain(media).chain(live));

        // Phase B
        let statistics = join_all(
            targets
                .iter()
                .filter(|t| t.kind.has_statistics())
                .map(|t| {
                    fetch_aux(
                        t.id,
                        "statistics",
                        api.device_statistics(&t.code, t.id, &today),
                        AuxUpdate::Statistics,
                    )
                }),
        )
        .await;
        self.apply_aux(statistics);

        // Phase C
        let graphs = join_all(
            targets
                .iter()
                .filter(|t| t.kind == DeviceKind::Litter)
                .map(|t| {
                    fetch_aux(
                        t.id,
                        "pet_graph",
                        api.pet_out_graph(&t.code, t.id),
                        AuxUpdate::PetGraph,
                    )
                }),
        )
        .await;
        self.apply_aux(graphs);
    }

    fn apply_aux(&self, updates: impl IntoIterator<Item = Option<(DeviceId, AuxUpdate)>>) {
        for (id, update) in updates.into_iter().flatten() {
            self.devices.update(id, |d| d.apply_aux(update));
        }
    }
}

async fn fetch_aux<F>(
    device_id: DeviceId,
    what: &'static str,
    request: F,
    wrap: fn(Value) -> AuxUpdate,
) -> Option<(DeviceId, AuxUpdate)>
where
    F: Future<Output = Result<Value, petkit_api::Error>>,
{
    match request.await {
        Ok(value) => Some((device_id, wrap(value))),
        Err(e) => {
            warn!(device_id, what, error = %e, "auxiliary fetch failed");
            None
        }
    }
}

/// Lay a pet profile over the account stub, keeping stub-only fields.
fn merge_profile(raw: &mut Option<Value>, profile: Value) {
    match (raw, profile) {
        (Some(Value::Object(base)), Value::Object(extra)) => base.extend(extra),
        (slot, profile) => *slot = Some(profile),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn profile_merges_over_stub() {
        let mut raw = Some(json!({ "petId": 9, "avatar": "a.png" }));
        merge_profile(&mut raw, json!({ "petId": 9, "weight": 4 }));
        let raw = raw.unwrap_or_default();
        assert_eq!(raw["avatar"], "a.png");
        assert_eq!(raw["weight"], 4);
    }

    #[test]
    fn profile_replaces_missing_stub() {
        let mut raw = None;
        merge_profile(&mut raw, json!({ "petId": 1 }));
        assert_eq!(raw, Some(json!({ "petId": 1 })));
    }
}
