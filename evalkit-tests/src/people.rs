use crate::{assert_error_code, silent_logs};
use evalkit::{
    Client, Condition, Connection, Filterable, FindArgs, RECORD_NOT_FOUND, Scope,
    Sortable, UNIQUE_CONSTRAINT_FAILED, UpdateData,
    schema::{Admin, AdminUnique, Instructor, InstructorUnique, Student, StudentUnique},
};

pub async fn people<C: Connection>(client: &mut Client<C>) {
    client
        .reset_schema()
        .await
        .expect("Could not reset the schema");

    // Create
    let ada = client
        .student()
        .create(&Student::new("S-001", "Ada Lovelace", "hash-ada"))
        .await
        .expect("Could not create a student");
    assert!(ada.id.is_set(), "The identifier is generated by the engine");
    assert!(ada.created_at.is_set());
    assert!(ada.updated_at.is_set());
    assert_eq!(ada.student_id, "S-001");
    assert_eq!(ada.name, "Ada Lovelace");

    let created = client
        .student()
        .create_many(
            &[
                Student::new("S-002", "Alan Turing", "hash-alan"),
                Student::new("S-003", "Grace Hopper", "hash-grace"),
                Student::new("S-004", "Edsger Dijkstra", "hash-edsger"),
                Student::new("S-005", "Barbara Liskov", "hash-barbara"),
            ],
            false,
        )
        .await
        .expect("Could not create the students");
    assert_eq!(created, 4);

    // Duplicates
    silent_logs! {
        assert_error_code(
            client
                .student()
                .create(&Student::new("S-001", "Someone Else", "hash"))
                .await,
            UNIQUE_CONSTRAINT_FAILED,
        );
    }
    let skipped = client
        .student()
        .create_many(
            &[
                Student::new("S-001", "Duplicate", "hash"),
                Student::new("S-006", "Niklaus Wirth", "hash-niklaus"),
            ],
            true,
        )
        .await
        .expect("Duplicates should be skipped");
    assert_eq!(skipped, 1);
    assert_eq!(client.student().count(()).await.expect("Could not count"), 6);

    // Find by key
    let id = *ada.id.get().expect("Stored");
    let found = client
        .student()
        .find_unique(StudentUnique::Id(id))
        .await
        .expect("Could not find the student")
        .expect("The student exists");
    assert_eq!(found, ada);
    let found = client
        .student()
        .find_unique(StudentUnique::StudentId("S-003".into()))
        .await
        .expect("Could not find the student")
        .expect("The student exists");
    assert_eq!(found.name, "Grace Hopper");
    assert_eq!(
        client
            .student()
            .find_unique(StudentUnique::StudentId("S-999".into()))
            .await
            .expect("Could not look for the student"),
        None
    );
    silent_logs! {
        assert_error_code(
            client
                .student()
                .find_unique_or_throw(StudentUnique::Id(-1))
                .await,
            RECORD_NOT_FOUND,
        );
    }

    // Filters and pages
    let names: Vec<String> = client
        .student()
        .find_many(
            FindArgs::new()
                .filter(Student::name.starts_with("A"))
                .order_by(Student::name.asc()),
        )
        .await
        .expect("Could not filter the students")
        .into_iter()
        .map(|v| v.name)
        .collect();
    assert_eq!(names, ["Ada Lovelace", "Alan Turing"]);

    let page: Vec<String> = client
        .student()
        .find_many(
            FindArgs::new()
                .order_by(Student::student_id.asc())
                .skip(1)
                .take(2),
        )
        .await
        .expect("Could not read a page")
        .into_iter()
        .map(|v| v.student_id)
        .collect();
    assert_eq!(page, ["S-002", "S-003"]);

    let last: Vec<String> = client
        .student()
        .find_many(FindArgs::new().take(-2))
        .await
        .expect("Could not read backwards")
        .into_iter()
        .map(|v| v.student_id)
        .collect();
    assert_eq!(last, ["S-005", "S-006"]);

    let last = client
        .student()
        .find_first(FindArgs::new().order_by(Student::student_id.asc()).take(-1))
        .await
        .expect("Could not find the last student")
        .expect("There are students");
    assert_eq!(last.student_id, "S-006");

    let matching = client
        .student()
        .count(
            Student::name
                .contains("ra")
                .or(Student::student_id.in_list(["S-001", "S-002"])),
        )
        .await
        .expect("Could not count");
    assert_eq!(matching, 5);
    assert_eq!(
        client
            .student()
            .count(Student::id.in_list(Vec::<i32>::new()))
            .await
            .expect("Could not count"),
        0
    );
    assert_eq!(
        client
            .student()
            .count(Condition::all().not())
            .await
            .expect("Could not count"),
        0
    );
    assert_eq!(
        client
            .student()
            .count(Student::name.contains("%"))
            .await
            .expect("Could not count"),
        0,
        "Wildcards in the pattern are matched literally"
    );

    // Update
    let renamed = client
        .student()
        .update(
            StudentUnique::StudentId("S-002".into()),
            UpdateData::new().set(Student::name, "Alan M. Turing"),
        )
        .await
        .expect("Could not update the student");
    assert_eq!(renamed.name, "Alan M. Turing");
    assert!(renamed.updated_at.is_set());
    silent_logs! {
        assert_error_code(
            client
                .student()
                .update(
                    StudentUnique::StudentId("S-999".into()),
                    UpdateData::new().set(Student::name, "Nobody"),
                )
                .await,
            RECORD_NOT_FOUND,
        );
        assert!(
            client
                .student()
                .update(
                    StudentUnique::Id(id),
                    UpdateData::new().increment(Student::name, 1),
                )
                .await
                .is_err(),
            "Text columns cannot be incremented"
        );
    }
    let updated = client
        .student()
        .update_many(
            Student::student_id.in_list(["S-004", "S-005", "S-999"]),
            UpdateData::new().set(Student::password, "reset"),
        )
        .await
        .expect("Could not update the students");
    assert_eq!(updated, 2);
    let nothing = client
        .student()
        .update_many(
            Student::student_id.equals("S-999"),
            UpdateData::new().set(Student::password, "reset"),
        )
        .await
        .expect("Could not update the students");
    assert_eq!(nothing, 0);

    // Upsert
    let instructor = client
        .instructor()
        .upsert(
            InstructorUnique::InstructorId("I-001".into()),
            &Instructor::new("I-001", "Donald Knuth", "hash-donald"),
            UpdateData::new().set(Instructor::name, "Donald E. Knuth"),
        )
        .await
        .expect("Could not upsert the instructor");
    assert_eq!(instructor.name, "Donald Knuth");
    let instructor = client
        .instructor()
        .upsert(
            InstructorUnique::InstructorId("I-001".into()),
            &Instructor::new("I-001", "Donald Knuth", "hash-donald"),
            UpdateData::new().set(Instructor::name, "Donald E. Knuth"),
        )
        .await
        .expect("Could not upsert the instructor");
    assert_eq!(instructor.name, "Donald E. Knuth");
    assert_eq!(
        client.instructor().count(()).await.expect("Could not count"),
        1
    );

    // Delete
    let admin = client
        .admin()
        .create(&Admin::new("A-001", "Root", "hash-root"))
        .await
        .expect("Could not create the admin");
    let deleted = client
        .admin()
        .delete(AdminUnique::AdminId("A-001".into()))
        .await
        .expect("Could not delete the admin");
    assert_eq!(deleted, admin);
    silent_logs! {
        assert_error_code(
            client
                .admin()
                .delete(AdminUnique::AdminId("A-001".into()))
                .await,
            RECORD_NOT_FOUND,
        );
    }
    let deleted = client
        .student()
        .delete_many(Student::password.equals("reset"))
        .await
        .expect("Could not delete the students");
    assert_eq!(deleted, 2);
    assert_eq!(client.student().count(()).await.expect("Could not count"), 4);

    // A record that was never stored has no key
    assert!(
        Student::new("S-100", "Draft", "hash")
            .enrollments(client)
            .await
            .is_err()
    );
}
