use sea_orm_migration::prelude::*;

use crate::migrations;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(migrations::m202510010001_create_users::Migration),
            Box::new(migrations::m202510010002_create_courses::Migration),
            Box::new(migrations::m202510010003_create_schools::Migration),
            Box::new(migrations::m202510010004_create_course_teachers::Migration),
            Box::new(migrations::m202510010005_create_tasks::Migration),
            Box::new(migrations::m202510010006_create_issues::Migration),
            Box::new(migrations::m202510010007_create_issue_followers::Migration),
            Box::new(migrations::m202510010008_create_events::Migration),
            Box::new(migrations::m202510010009_create_files::Migration),
        ]
    }
}
