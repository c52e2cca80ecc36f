use crate::{assert_error_code, silent_logs};
use evalkit::{
    Client, Connection, FOREIGN_KEY_CONSTRAINT_FAILED, Filterable, FindArgs, Scope, Sortable,
    UNIQUE_CONSTRAINT_FAILED,
    schema::{
        Instructor, InstructorSubject, Student, StudentSubject, StudentSubjectUnique, Subject,
        SubjectUnique,
    },
};

pub async fn enrollment<C: Connection>(client: &mut Client<C>) {
    client
        .reset_schema()
        .await
        .expect("Could not reset the schema");

    let mut students = Vec::new();
    for (code, name) in [("S-101", "Ann"), ("S-102", "Bob"), ("S-103", "Cid")] {
        students.push(
            client
                .student()
                .create(&Student::new(code, name, "hash"))
                .await
                .expect("Could not create the student"),
        );
    }
    let mut subjects = Vec::new();
    for (code, name) in [
        ("CS101", "Programming"),
        ("CS102", "Data Structures"),
        ("MA101", "Calculus"),
    ] {
        subjects.push(
            client
                .subject()
                .create(&Subject::new(code, name))
                .await
                .expect("Could not create the subject"),
        );
    }
    let instructor = client
        .instructor()
        .create(&Instructor::new("I-101", "Dana", "hash"))
        .await
        .expect("Could not create the instructor");
    let student_id = |i: usize| *students[i].id.get().expect("Stored");
    let subject_id = |i: usize| *subjects[i].id.get().expect("Stored");
    let instructor_id = *instructor.id.get().expect("Stored");

    let enrollments = [
        StudentSubject::new(student_id(0), subject_id(0)),
        StudentSubject::new(student_id(0), subject_id(1)),
        StudentSubject::new(student_id(1), subject_id(0)),
        StudentSubject::new(student_id(2), subject_id(2)),
    ];
    let created = client
        .student_subject()
        .create_many(&enrollments, false)
        .await
        .expect("Could not enroll the students");
    assert_eq!(created, 4);
    client
        .instructor_subject()
        .create_many(
            &[
                InstructorSubject::new(instructor_id, subject_id(0)),
                InstructorSubject::new(instructor_id, subject_id(2)),
            ],
            false,
        )
        .await
        .expect("Could not assign the instructor");

    // The composite key is unique and both sides must exist
    silent_logs! {
        assert_error_code(
            client
                .student_subject()
                .create(&StudentSubject::new(student_id(0), subject_id(0)))
                .await,
            UNIQUE_CONSTRAINT_FAILED,
        );
        assert_error_code(
            client
                .student_subject()
                .create(&StudentSubject::new(student_id(0), 9_999))
                .await,
            FOREIGN_KEY_CONSTRAINT_FAILED,
        );
        assert_error_code(
            client
                .instructor_subject()
                .create(&InstructorSubject::new(9_999, subject_id(1)))
                .await,
            FOREIGN_KEY_CONSTRAINT_FAILED,
        );
    }

    let enrollment = client
        .student_subject()
        .find_unique(StudentSubjectUnique::StudentIdSubjectId(
            student_id(0),
            subject_id(1),
        ))
        .await
        .expect("Could not find the enrollment")
        .expect("The enrollment exists");
    assert!(enrollment.assigned_at.is_set());
    assert_eq!(
        enrollment
            .student(client)
            .await
            .expect("Could not load the student")
            .name,
        "Ann"
    );
    assert_eq!(
        enrollment
            .subject(client)
            .await
            .expect("Could not load the subject")
            .code,
        "CS102"
    );

    // Relations
    let codes: Vec<String> = students[0]
        .subjects(client)
        .await
        .expect("Could not load the subjects")
        .into_iter()
        .map(|v| v.code)
        .collect();
    assert_eq!(codes, ["CS101", "CS102"]);
    let names: Vec<String> = subjects[0]
        .students(client)
        .await
        .expect("Could not load the students")
        .into_iter()
        .map(|v| v.name)
        .collect();
    assert_eq!(names, ["Ann", "Bob"]);
    let codes: Vec<String> = instructor
        .subjects(client)
        .await
        .expect("Could not load the subjects")
        .into_iter()
        .map(|v| v.code)
        .collect();
    assert_eq!(codes, ["CS101", "MA101"]);
    let instructors = subjects[2]
        .instructors(client)
        .await
        .expect("Could not load the instructors");
    assert_eq!(instructors, [instructor.clone()]);
    assert!(
        subjects[1]
            .instructors(client)
            .await
            .expect("Could not load the instructors")
            .is_empty()
    );

    // Distinct keeps the first record of every subject
    let distinct: Vec<i32> = client
        .student_subject()
        .find_many(
            FindArgs::new()
                .order_by(StudentSubject::subject_id.asc())
                .order_by(StudentSubject::student_id.asc())
                .distinct([StudentSubject::subject_id]),
        )
        .await
        .expect("Could not read the distinct enrollments")
        .into_iter()
        .map(|v| v.student_id)
        .collect();
    assert_eq!(distinct, [student_id(0), student_id(0), student_id(2)]);
    assert_eq!(
        client
            .student_subject()
            .count(FindArgs::new().distinct([StudentSubject::student_id]))
            .await
            .expect("Could not count"),
        3
    );

    // Deleting a subject removes its enrollments and assignments
    client
        .subject()
        .delete(SubjectUnique::Code("CS101".into()))
        .await
        .expect("Could not delete the subject");
    assert_eq!(
        client
            .student_subject()
            .count(StudentSubject::subject_id.equals(subject_id(0)))
            .await
            .expect("Could not count"),
        0
    );
    assert_eq!(
        client
            .instructor_subject()
            .count(())
            .await
            .expect("Could not count"),
        1
    );
    assert_eq!(
        client
            .student_subject()
            .count(())
            .await
            .expect("Could not count"),
        2
    );
}
