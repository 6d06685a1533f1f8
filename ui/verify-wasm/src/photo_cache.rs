//! IndexedDB-backed photo cache.
//!
//! One database (`rp-verify`) with a single `photos` object store keyed
//! by slot id; `put` overwrites. Every operation surfaces store
//! unavailability as an error that callers treat as a cache miss.

use async_trait::async_trait;
use rp_storage::{PhotoCache, StorageError, StorageResult};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{IdbDatabase, IdbOpenDbRequest, IdbRequest, IdbTransactionMode};

const DB_NAME: &str = "rp-verify";
const DB_VERSION: u32 = 1;
const STORE_NAME: &str = "photos";

pub struct IdbPhotoCache {
    db: IdbDatabase,
}

/// Adapt an IdbRequest to a JS promise so it can be awaited.
fn await_request(request: &IdbRequest) -> js_sys::Promise {
    let request = request.clone();
    js_sys::Promise::new(&mut |resolve, reject| {
        let req = request.clone();
        let on_success = Closure::once(move |_: web_sys::Event| {
            let value = req.result().unwrap_or(JsValue::NULL);
            let _ = resolve.call1(&JsValue::NULL, &value);
        });
        request.set_onsuccess(Some(on_success.as_ref().unchecked_ref()));
        on_success.forget();

        let req = request.clone();
        let on_error = Closure::once(move |_: web_sys::Event| {
            let message = req
                .error()
                .ok()
                .flatten()
                .map(|e| e.message())
                .unwrap_or_else(|| "request failed".to_string());
            let _ = reject.call1(&JsValue::NULL, &JsValue::from_str(&message));
        });
        request.set_onerror(Some(on_error.as_ref().unchecked_ref()));
        on_error.forget();
    })
}

fn backend_err(err: JsValue) -> StorageError {
    StorageError::Backend(
        err.as_string()
            .unwrap_or_else(|| format!("{err:?}")),
    )
}

impl IdbPhotoCache {
    /// Open (and create on first use) the photo database. Fails with
    /// `Unavailable` when the browser exposes no IndexedDB at all.
    pub async fn open() -> StorageResult<IdbPhotoCache> {
        let window = web_sys::window()
            .ok_or_else(|| StorageError::Unavailable("no window".into()))?;
        let factory = window
            .indexed_db()
            .map_err(backend_err)?
            .ok_or_else(|| StorageError::Unavailable("indexedDB".into()))?;

        let request: IdbOpenDbRequest = factory
            .open_with_u32(DB_NAME, DB_VERSION)
            .map_err(backend_err)?;

        let on_upgrade = Closure::once(move |event: web_sys::IdbVersionChangeEvent| {
            let Some(target) = event.target() else { return };
            let req: IdbOpenDbRequest = target.unchecked_into();
            let Ok(result) = req.result() else { return };
            let db: IdbDatabase = result.unchecked_into();
            if !db.object_store_names().contains(STORE_NAME) {
                let _ = db.create_object_store(STORE_NAME);
            }
        });
        request.set_onupgradeneeded(Some(on_upgrade.as_ref().unchecked_ref()));
        on_upgrade.forget();

        let value = JsFuture::from(await_request(request.unchecked_ref()))
            .await
            .map_err(backend_err)?;
        Ok(IdbPhotoCache {
            db: value.unchecked_into(),
        })
    }

    fn store(&self, mode: IdbTransactionMode) -> StorageResult<web_sys::IdbObjectStore> {
        let tx = self
            .db
            .transaction_with_str_and_mode(STORE_NAME, mode)
            .map_err(backend_err)?;
        tx.object_store(STORE_NAME).map_err(backend_err)
    }
}

#[async_trait(?Send)]
impl PhotoCache for IdbPhotoCache {
    async fn put(&self, id: &str, data: &str) -> StorageResult<()> {
        let store = self.store(IdbTransactionMode::Readwrite)?;
        let request = store
            .put_with_key(&JsValue::from_str(data), &JsValue::from_str(id))
            .map_err(backend_err)?;
        JsFuture::from(await_request(&request))
            .await
            .map_err(backend_err)?;
        Ok(())
    }

    async fn get(&self, id: &str) -> StorageResult<Option<String>> {
        let store = self.store(IdbTransactionMode::Readonly)?;
        let request = store.get(&JsValue::from_str(id)).map_err(backend_err)?;
        let value = JsFuture::from(await_request(&request))
            .await
            .map_err(backend_err)?;
        Ok(value.as_string())
    }

    async fn clear(&self) -> StorageResult<()> {
        let store = self.store(IdbTransactionMode::Readwrite)?;
        let request = store.clear().map_err(backend_err)?;
        JsFuture::from(await_request(&request))
            .await
            .map_err(backend_err)?;
        Ok(())
    }
}
