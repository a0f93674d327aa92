use std::path::Path;

use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::entities::{image, project};
use crate::services::storage::FileStorage;

/// Hard deletion of a project together with everything stored for it.
pub struct CleanupService {
    db: DatabaseConnection,
    storage: FileStorage,
}

impl CleanupService {
    pub fn new(db: DatabaseConnection, storage: FileStorage) -> Self {
        Self { db, storage }
    }

    /// Removes the project's files, then its row.
    ///
    /// File removal is best effort: failures are logged and never stop the
    /// row delete. Image and annotation rows go with the project through the
    /// cascading foreign keys.
    pub async fn delete_project(&self, project: &project::Model) -> Result<(), DbErr> {
        tracing::info!(project_id = %project.id, name = %project.name, "deleting project");

        self.remove_image_files(project.id).await?;

        if let Err(e) = self.storage.remove_project_dir(project.id).await {
            tracing::warn!(project_id = %project.id, error = %e, "failed to remove project directory");
        }

        project::Entity::delete_by_id(project.id).exec(&self.db).await?;
        Ok(())
    }

    async fn remove_image_files(&self, project_id: Uuid) -> Result<(), DbErr> {
        let images = image::Entity::find()
            .filter(image::Column::ProjectId.eq(project_id))
            .all(&self.db)
            .await?;

        tracing::debug!(%project_id, count = images.len(), "removing image files");

        for img in images {
            if let Err(e) = self.storage.remove_file(Path::new(&img.file_path)).await {
                tracing::warn!(image_id = %img.id, error = %e, "failed to remove image file");
            }
        }

        Ok(())
    }
}
