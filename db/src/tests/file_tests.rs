use crate::models::{
    course::Model as CourseModel,
    event::{EventPayload, Model as EventModel},
    file::Model as FileModel,
    issue::Model as IssueModel,
    task::Model as TaskModel,
    user::Model as UserModel,
};
use crate::test_utils::setup_test_db;

#[tokio::test]
async fn rewrite_path_updates_every_row_sharing_the_path() {
    let db = setup_test_db().await;
    let student = UserModel::create(&db, "s", "s@example.com", "", "", "pw", false)
        .await
        .unwrap();
    let course = CourseModel::create(&db, "C", 2025).await.unwrap();
    let task = TaskModel::create(&db, course.id, "T", 5, None).await.unwrap();
    let issue = IssueModel::get_or_create(&db, student.id, task.id).await.unwrap();
    let event = EventModel::create(&db, issue.id, Some(student.id), &EventPayload::File { review: None })
        .await
        .unwrap();

    let a = FileModel::create(&db, event.id, "files/shared.zip", "shared.zip").await.unwrap();
    let b = FileModel::create(&db, event.id, "files/shared.zip", "shared.zip").await.unwrap();
    let other = FileModel::create(&db, event.id, "files/other.py", "other.py").await.unwrap();

    let changed = FileModel::rewrite_path(&db, "files/shared.zip", "s3/files/shared.zip")
        .await
        .unwrap();

    assert_eq!(changed, 2);
    let moved = FileModel::find_by_path(&db, "s3/files/shared.zip").await.unwrap();
    assert_eq!(moved.iter().map(|f| f.id).collect::<Vec<_>>(), vec![a.id, b.id]);
    let untouched = FileModel::find_by_path(&db, "files/other.py").await.unwrap();
    assert_eq!(untouched[0].id, other.id);
    assert_eq!(other.to_string(), "other.py");

    let ordered = FileModel::all_ordered(&db).await.unwrap();
    assert_eq!(ordered.len(), 3);
    assert_eq!(FileModel::for_events(&db, &[event.id]).await.unwrap().len(), 3);
}
