//! In-memory [`IRemoteStore`] used by unit tests
//!
//! Objects live in a vector in insertion order, which doubles as the store
//! order returned by listings. Every port call is recorded so tests can
//! assert how many round trips an operation needed.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Mutex;

use gdrive_core::domain::{
    DriveError, ObjectId, PermissionEntry, PermissionRole, ProgressCallback, ProgressTracker,
    RemoteObject, Visibility, PUBLIC_PERMISSION_ID,
};
use gdrive_core::ports::{DownloadSource, IRemoteStore};

#[derive(Default)]
struct State {
    objects: Vec<RemoteObject>,
    contents: HashMap<ObjectId, Vec<u8>>,
    calls: Vec<String>,
    next_id: u64,
    fail_next_mutation: Option<DriveError>,
}

impl State {
    fn allocate_id(&mut self) -> ObjectId {
        self.next_id += 1;
        ObjectId::new(format!("id-{}", self.next_id)).unwrap()
    }

    fn find_mut(&mut self, id: &ObjectId) -> Result<&mut RemoteObject, DriveError> {
        self.objects
            .iter_mut()
            .find(|o| &o.id == id)
            .ok_or_else(|| DriveError::NotFound(format!("object '{id}'")))
    }

    fn take_failure(&mut self) -> Result<(), DriveError> {
        match self.fail_next_mutation.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

pub(crate) struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
        }
    }

    fn insert(&self, object: RemoteObject) -> ObjectId {
        let id = object.id.clone();
        self.state.lock().unwrap().objects.push(object);
        id
    }

    fn next_id(&self) -> ObjectId {
        self.state.lock().unwrap().allocate_id()
    }

    pub(crate) fn add_folder(&self, name: &str, parent: &ObjectId) -> ObjectId {
        let id = self.next_id();
        self.insert(RemoteObject::folder(id, name, vec![parent.clone()]))
    }

    pub(crate) fn add_file(&self, name: &str, parent: &ObjectId, size: u64) -> ObjectId {
        let id = self.next_id();
        let mut object = RemoteObject::file(id.clone(), name, vec![parent.clone()], size);
        object.download_link = Some(format!("https://drive.test/uc?id={id}"));
        object.web_view_link = Some(format!("https://drive.test/file/d/{id}/view"));
        self.insert(object)
    }

    pub(crate) fn add_document(
        &self,
        name: &str,
        parent: &ObjectId,
        export_links: &[(&str, &str)],
    ) -> ObjectId {
        let id = self.next_id();
        let mut object = RemoteObject::folder(id.clone(), name, vec![parent.clone()]);
        object.is_folder = false;
        object.mime_type = "application/vnd.google-apps.document".to_string();
        object.web_view_link = Some(format!("https://drive.test/document/d/{id}/edit"));
        object.export_links = export_links
            .iter()
            .map(|(mime, url)| (mime.to_string(), url.to_string()))
            .collect::<BTreeMap<_, _>>();
        self.insert(object)
    }

    /// Inserts an object as-is
    pub(crate) fn add_object(&self, object: RemoteObject) -> ObjectId {
        self.insert(object)
    }

    pub(crate) fn set_content(&self, id: &ObjectId, content: &[u8]) {
        self.state
            .lock()
            .unwrap()
            .contents
            .insert(id.clone(), content.to_vec());
    }

    pub(crate) fn object(&self, id: &ObjectId) -> Option<RemoteObject> {
        self.state
            .lock()
            .unwrap()
            .objects
            .iter()
            .find(|o| &o.id == id)
            .cloned()
    }

    pub(crate) fn objects(&self) -> Vec<RemoteObject> {
        self.state.lock().unwrap().objects.clone()
    }

    /// Makes the next mutating call fail with `error`
    pub(crate) fn fail_next_mutation(&self, error: DriveError) {
        self.state.lock().unwrap().fail_next_mutation = Some(error);
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.state.lock().unwrap().calls.len()
    }

    fn record(&self, call: String) -> std::sync::MutexGuard<'_, State> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        state
    }
}

fn report(total: u64, progress: Option<ProgressCallback>) {
    let mut tracker = ProgressTracker::new(Some(total), progress);
    tracker.advance(total);
}

#[async_trait::async_trait]
impl IRemoteStore for MemoryStore {
    async fn list_children(
        &self,
        parent: &ObjectId,
        include_trashed: bool,
    ) -> Result<Vec<RemoteObject>, DriveError> {
        let state = self.record(format!("list_children:{parent}:{include_trashed}"));
        Ok(state
            .objects
            .iter()
            .filter(|o| o.parent_ids.contains(parent) && o.trashed == include_trashed)
            .cloned()
            .collect())
    }

    async fn list_trash(&self) -> Result<Vec<RemoteObject>, DriveError> {
        let state = self.record("list_trash".into());
        Ok(state.objects.iter().filter(|o| o.trashed).cloned().collect())
    }

    async fn get_object(&self, id: &ObjectId) -> Result<RemoteObject, DriveError> {
        let mut state = self.record(format!("get_object:{id}"));
        state.find_mut(id).map(|o| o.clone())
    }

    async fn create_folder(
        &self,
        name: &str,
        parent: &ObjectId,
    ) -> Result<RemoteObject, DriveError> {
        let mut state = self.record(format!("create_folder:{name}:{parent}"));
        state.take_failure()?;
        let id = state.allocate_id();
        let folder = RemoteObject::folder(id, name, vec![parent.clone()]);
        state.objects.push(folder.clone());
        Ok(folder)
    }

    async fn set_parent(
        &self,
        id: &ObjectId,
        add_parent: &ObjectId,
        remove_parents: &[ObjectId],
    ) -> Result<RemoteObject, DriveError> {
        let mut state = self.record(format!("set_parent:{id}:{add_parent}"));
        state.take_failure()?;
        let object = state.find_mut(id)?;
        object.parent_ids.retain(|p| !remove_parents.contains(p));
        object.parent_ids.push(add_parent.clone());
        Ok(object.clone())
    }

    async fn copy(
        &self,
        id: &ObjectId,
        destination_parent: &ObjectId,
    ) -> Result<RemoteObject, DriveError> {
        let mut state = self.record(format!("copy:{id}:{destination_parent}"));
        state.take_failure()?;
        let mut copy = state.find_mut(id)?.clone();
        copy.id = state.allocate_id();
        copy.parent_ids = vec![destination_parent.clone()];
        copy.permissions.clear();
        state.objects.push(copy.clone());
        Ok(copy)
    }

    async fn rename(&self, id: &ObjectId, new_name: &str) -> Result<RemoteObject, DriveError> {
        let mut state = self.record(format!("rename:{id}:{new_name}"));
        state.take_failure()?;
        let object = state.find_mut(id)?;
        object.name = new_name.to_string();
        Ok(object.clone())
    }

    async fn set_trashed(
        &self,
        id: &ObjectId,
        trashed: bool,
    ) -> Result<RemoteObject, DriveError> {
        let mut state = self.record(format!("set_trashed:{id}:{trashed}"));
        state.take_failure()?;
        let object = state.find_mut(id)?;
        object.trashed = trashed;
        Ok(object.clone())
    }

    async fn delete(&self, id: &ObjectId) -> Result<(), DriveError> {
        let mut state = self.record(format!("delete:{id}"));
        if id.is_root() {
            return Err(DriveError::RootProtected("delete".into()));
        }
        state.take_failure()?;
        state.find_mut(id)?;
        state.objects.retain(|o| &o.id != id);
        Ok(())
    }

    async fn empty_trash(&self) -> Result<(), DriveError> {
        let mut state = self.record("empty_trash".into());
        state.take_failure()?;
        state.objects.retain(|o| !o.trashed);
        Ok(())
    }

    async fn set_permission(
        &self,
        id: &ObjectId,
        visibility: Visibility,
    ) -> Result<(), DriveError> {
        let mut state = self.record(format!("set_permission:{id}:{visibility:?}"));
        state.take_failure()?;
        let object = state.find_mut(id)?;
        match visibility {
            Visibility::Public => {
                if !object.is_public() {
                    object
                        .permissions
                        .push(PermissionEntry::from_id(PUBLIC_PERMISSION_ID));
                }
            }
            Visibility::Private => object
                .permissions
                .retain(|p| p.role != PermissionRole::Public),
        }
        Ok(())
    }

    async fn upload_file(
        &self,
        source: &Path,
        parent: &ObjectId,
        name: &str,
        progress: Option<ProgressCallback>,
    ) -> Result<RemoteObject, DriveError> {
        let content = tokio::fs::read(source).await?;
        let object = {
            let mut state = self.record(format!("upload_file:{name}:{parent}"));
            state.take_failure()?;
            let id = state.allocate_id();
            let object =
                RemoteObject::file(id.clone(), name, vec![parent.clone()], content.len() as u64);
            state.objects.push(object.clone());
            state.contents.insert(id, content.clone());
            object
        };
        report(content.len() as u64, progress);
        Ok(object)
    }

    async fn download(
        &self,
        source: &DownloadSource,
        destination: &Path,
        declared_size: Option<u64>,
        progress: Option<ProgressCallback>,
    ) -> Result<u64, DriveError> {
        let content = {
            let state = self.record(format!("download:{source:?}"));
            match source {
                DownloadSource::Content(id) => state.contents.get(id).cloned().unwrap_or_default(),
                DownloadSource::Export { url, .. } => url.as_bytes().to_vec(),
            }
        };
        tokio::fs::write(destination, &content).await?;
        report(declared_size.unwrap_or(content.len() as u64), progress);
        Ok(content.len() as u64)
    }
}
